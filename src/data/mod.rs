pub mod value;

pub use value::{parse_counter_expr, CounterExpr, CounterOp, Mutation, Value};

/// Field name -> value map used for keys and column data
pub type Row = std::collections::HashMap<String, Value>;
