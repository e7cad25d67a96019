pub mod shared {
    pub mod infrastructure {
        pub mod graph_store;
    }
}

pub mod modules {
    pub mod energy_graph {
        pub mod core {
            pub mod errors;
            pub mod nodes;
            pub mod type_defs;
        }
        pub mod use_cases {
            pub mod query_nodes {
                pub mod filter;
                pub mod handler;
                pub mod inbound {
                    pub mod graphql;
                }
            }
            pub mod create_nodes {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod graphql;
                }
            }
            pub mod ingest_sample_data {
                pub mod handler;
            }
        }
    }
}

pub mod shell;
