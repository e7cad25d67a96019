// Declarative graph schema: node types, their scalar properties, and the
// relationship annotations that connect them.
//
// Boundaries
// - No input or output. Resolvers and the create handler read these descriptors
//   to know which label, relationship type and direction to use.

use serde_json::Value;
use std::fmt::Write;
use thiserror::Error;

use crate::shared::infrastructure::graph_store::{Direction, Properties};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Int,
    Float,
    String,
}

impl Scalar {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Scalar::Int => value.is_i64() || value.is_u64(),
            Scalar::Float => value.is_number(),
            Scalar::String => value.is_string(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Scalar::Int => "Int",
            Scalar::Float => "Float",
            Scalar::String => "String",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// `Target!`
    One,
    /// `Target`
    Optional,
    /// `[Target!]!`
    Many,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: &'static str,
    pub scalar: Scalar,
    pub required: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RelationshipDef {
    pub field: &'static str,
    pub rel_type: &'static str,
    pub direction: Direction,
    pub target: &'static str,
    pub cardinality: Cardinality,
}

#[derive(Debug, PartialEq, Eq)]
pub struct NodeTypeDef {
    pub label: &'static str,
    pub properties: &'static [PropertyDef],
    pub relationships: &'static [RelationshipDef],
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeDefError {
    #[error("{label}.{field} points at undeclared type {target}")]
    UnknownTarget {
        label: &'static str,
        field: &'static str,
        target: &'static str,
    },

    #[error("{label}.{field} ({rel_type} {direction}) has no inverse on {target}")]
    MissingInverse {
        label: &'static str,
        field: &'static str,
        rel_type: &'static str,
        direction: &'static str,
        target: &'static str,
    },

    #[error("{label}.{property} is required")]
    MissingProperty {
        label: &'static str,
        property: &'static str,
    },

    #[error("{label}.{property} expects {expected}")]
    WrongScalar {
        label: &'static str,
        property: &'static str,
        expected: &'static str,
    },

    #[error("{label} has no property {property}")]
    UnknownProperty { label: &'static str, property: String },

    #[error("{label} has no relationship {field}")]
    UnknownRelationship {
        label: &'static str,
        field: &'static str,
    },
}

const fn property(name: &'static str, scalar: Scalar, required: bool) -> PropertyDef {
    PropertyDef {
        name,
        scalar,
        required,
    }
}

const fn relationship(
    field: &'static str,
    rel_type: &'static str,
    direction: Direction,
    target: &'static str,
    cardinality: Cardinality,
) -> RelationshipDef {
    RelationshipDef {
        field,
        rel_type,
        direction,
        target,
        cardinality,
    }
}

pub static BUILDING: NodeTypeDef = NodeTypeDef {
    label: "Building",
    properties: &[
        property("id", Scalar::Int, true),
        property("name", Scalar::String, true),
        property("address", Scalar::String, true),
        property("totalEnergyConsumption", Scalar::Float, false),
    ],
    relationships: &[
        relationship("devices", "HAS_DEVICE", Direction::Out, "Device", Cardinality::Many),
        relationship("meters", "HAS_METER", Direction::Out, "Meter", Cardinality::Many),
    ],
};

pub static DEVICE: NodeTypeDef = NodeTypeDef {
    label: "Device",
    properties: &[
        property("id", Scalar::Int, true),
        property("name", Scalar::String, true),
        property("type", Scalar::String, true),
        property("powerConsumption", Scalar::Float, false),
        property("status", Scalar::String, false),
    ],
    relationships: &[
        relationship("building", "HAS_DEVICE", Direction::In, "Building", Cardinality::One),
        relationship("readings", "HAS_READING", Direction::Out, "Reading", Cardinality::Many),
    ],
};

pub static METER: NodeTypeDef = NodeTypeDef {
    label: "Meter",
    properties: &[
        property("id", Scalar::Int, true),
        property("serialNumber", Scalar::String, true),
        property("type", Scalar::String, true),
    ],
    relationships: &[
        relationship("building", "HAS_METER", Direction::In, "Building", Cardinality::One),
        relationship("readings", "HAS_READING", Direction::Out, "Reading", Cardinality::Many),
    ],
};

pub static READING: NodeTypeDef = NodeTypeDef {
    label: "Reading",
    properties: &[
        property("id", Scalar::Int, true),
        property("value", Scalar::Float, true),
        property("unit", Scalar::String, true),
    ],
    relationships: &[
        relationship("device", "HAS_READING", Direction::In, "Device", Cardinality::Optional),
        relationship("meter", "HAS_READING", Direction::In, "Meter", Cardinality::Optional),
    ],
};

pub static TYPE_DEFS: [&NodeTypeDef; 4] = [&BUILDING, &DEVICE, &METER, &READING];

pub fn node_type(label: &str) -> Option<&'static NodeTypeDef> {
    TYPE_DEFS.iter().copied().find(|def| def.label == label)
}

impl NodeTypeDef {
    pub fn relationship(&self, field: &str) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|rel| rel.field == field)
    }

    pub fn validate_properties(&self, properties: &Properties) -> Result<(), TypeDefError> {
        for key in properties.keys() {
            if !self.properties.iter().any(|def| def.name == key) {
                return Err(TypeDefError::UnknownProperty {
                    label: self.label,
                    property: key.clone(),
                });
            }
        }
        for def in self.properties {
            match properties.get(def.name) {
                None | Some(Value::Null) if def.required => {
                    return Err(TypeDefError::MissingProperty {
                        label: self.label,
                        property: def.name,
                    });
                }
                Some(value) if !value.is_null() && !def.scalar.accepts(value) => {
                    return Err(TypeDefError::WrongScalar {
                        label: self.label,
                        property: def.name,
                        expected: def.scalar.as_str(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Renders the annotated type declaration, e.g.
    /// `devices: [Device!]! @relationship(type: "HAS_DEVICE", direction: OUT)`.
    pub fn to_sdl(&self) -> String {
        let mut sdl = format!("type {} {{\n", self.label);
        for def in self.properties {
            let bang = if def.required { "!" } else { "" };
            let _ = writeln!(sdl, "  {}: {}{bang}", def.name, def.scalar.as_str());
        }
        for rel in self.relationships {
            let shape = match rel.cardinality {
                Cardinality::One => format!("{}!", rel.target),
                Cardinality::Optional => rel.target.to_string(),
                Cardinality::Many => format!("[{}!]!", rel.target),
            };
            let _ = writeln!(
                sdl,
                "  {}: {shape} @relationship(type: \"{}\", direction: {})",
                rel.field,
                rel.rel_type,
                rel.direction.as_str()
            );
        }
        sdl.push('}');
        sdl
    }
}

/// Checks that every relationship points at a declared type and is declared
/// from both ends with opposite directions.
pub fn validate_type_defs(defs: &[&'static NodeTypeDef]) -> Result<(), TypeDefError> {
    for def in defs {
        for rel in def.relationships {
            let target = defs
                .iter()
                .find(|candidate| candidate.label == rel.target)
                .ok_or(TypeDefError::UnknownTarget {
                    label: def.label,
                    field: rel.field,
                    target: rel.target,
                })?;
            let has_inverse = target.relationships.iter().any(|other| {
                other.rel_type == rel.rel_type
                    && other.target == def.label
                    && other.direction == rel.direction.reverse()
            });
            if !has_inverse {
                return Err(TypeDefError::MissingInverse {
                    label: def.label,
                    field: rel.field,
                    rel_type: rel.rel_type,
                    direction: rel.direction.as_str(),
                    target: rel.target,
                });
            }
        }
    }
    Ok(())
}
