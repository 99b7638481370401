mod common;
mod csharp;

pub use common::{simple_type_name, Parser, ScriptInfo, TypeDecl};
pub use csharp::CSharpParser;
