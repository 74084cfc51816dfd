#![doc = include_str!("../README.md")]

pub mod call;
pub mod cst;
pub mod definition;
pub mod diagnostics;
pub mod engine;
pub mod environment;
pub mod error;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod registry;
pub mod span;
pub mod token;
pub mod walker;

pub use call::{Call, Range};
pub use definition::{
    Alias, ArgDef, ArgType, Category, Definition, Handler, HandlerContext, ListPolicy, RegisterOptions, Source,
    UnnamedArgDefs,
};
pub use diagnostics::{CollectingDiagnostics, Diagnostics, NoopDiagnostics, StderrDiagnostics};
pub use engine::Engine;
pub use environment::{
    Bucket, CharacterFields, DynamicValue, Environment, EnvironmentBuilder, Functions, Names, OriginalFn,
    PostProcessFn, Provider, RawEnvContext,
};
pub use error::{HandlerOutcome, RegistrationError};
pub use normalize::{normalize, NormalizeInput};
pub use registry::Registry;
