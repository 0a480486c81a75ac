extern crate chrono;
extern crate fern;
extern crate log;
extern crate serenity;

pub mod event_handler;
pub mod logger;
#[macro_use]
pub mod macros;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type RegisterFuture<'a> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), BoxError>> + 'a + Send>>;

/// What a bot module hands to `bb_main` so it can be plugged into the client.
///
/// Modules are registered in order, so a module may read from the typemap what an
/// earlier module inserted (the points module needs the database pool for example).
pub struct ModuleDeclaration {
    pub module_name: &'static str,
    pub register_typemap: for<'a> fn(&'a mut serenity::prelude::TypeMap) -> RegisterFuture<'a>,
    pub register_event_handler: fn(&mut crate::event_handler::EventHandlerManager),
    pub register_intent: fn(
        serenity::model::gateway::GatewayIntents,
    ) -> serenity::model::gateway::GatewayIntents,
}

/// Result of a message handler.
///
/// `Message` goes to the user only, `Error` goes to the log only and `Both` does both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Message(String),
    Error(String),
    Both { msg: String, err: String },
}

impl Error {
    /// The text the user should see, if any
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Error::Message(msg) | Error::Both { msg, .. } => Some(msg),
            Error::Error(_) => None,
        }
    }

    /// The text that should be logged, if any
    pub fn log_message(&self) -> Option<&str> {
        match self {
            Error::Error(err) | Error::Both { err, .. } => Some(err),
            Error::Message(_) => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::Message(_) => Ok(()),
            Error::Error(s) => write!(f, "{}", s),
            Error::Both { err, .. } => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}
