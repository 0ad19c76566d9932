use std::borrow::Cow;

/// Boxed error a fallible handler may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What a fallible handler returns.
pub type HandlerResult = Result<(), BoxError>;

/// Errors that can occur while dispatching events.
#[herald_derive::herald_error]
pub enum EventBusError {
    /// A subscription was handed an event of a different runtime type.
    /// This indicates an invariant violation in the type registry.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A fallible handler failed; the remaining handlers of the pass were skipped.
    #[error("Handler failed{}: {source}", format_context(.context))]
    Handler { source: BoxError, context: Option<Cow<'static, str>> },
}
