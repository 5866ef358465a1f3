pub mod assembler;
pub mod augment;
pub mod constraint_builder;
pub mod schema_builder;
pub mod session;
pub mod table_graph;
