use std::fmt::{Display, Formatter};

use launchpad_core::Validate;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Callable kind of one route operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Read-only call returning one output.
    Query,
    /// Side-effecting call returning one output.
    Mutation,
    /// Server push stream of outputs, open until the client disconnects.
    Subscription,
}

impl OperationKind {
    /// Returns the lower-case kind name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Runtime description of one procedure, stored at its leaf of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Dotted namespace path, e.g. `waitlist.entry.create`.
    pub path: &'static str,
    /// Callable kind.
    pub kind: OperationKind,
    /// Input type name.
    pub input: &'static str,
    /// Output type name; the item type for subscriptions.
    pub output: &'static str,
}

/// A typed route operation.
///
/// Implemented by zero-sized marker types declared with [`procedure!`].
/// Inputs are validated before any resolver sees them.
///
/// [`procedure!`]: crate::procedure
pub trait Procedure: Send + Sync + 'static {
    /// Dotted namespace path.
    const PATH: &'static str;
    /// Callable kind.
    const KIND: OperationKind;
    /// Request payload.
    type Input: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;
    /// Response payload, or stream item for subscriptions.
    type Output: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Returns the runtime descriptor of this procedure.
    #[must_use]
    fn descriptor() -> OperationDescriptor {
        OperationDescriptor {
            path: Self::PATH,
            kind: Self::KIND,
            input: std::any::type_name::<Self::Input>(),
            output: std::any::type_name::<Self::Output>(),
        }
    }
}

/// Declares procedure marker types.
///
/// ```ignore
/// procedure! {
///     /// Exchanges credentials for a token.
///     pub Login: mutation "auth.login" (LoginInput) -> LoginOutput;
/// }
/// ```
#[macro_export]
macro_rules! procedure {
    (@kind query) => { $crate::OperationKind::Query };
    (@kind mutation) => { $crate::OperationKind::Mutation };
    (@kind subscription) => { $crate::OperationKind::Subscription };
    ($(
        $(#[$meta:meta])*
        $vis:vis $name:ident : $kind:ident $path:literal ($input:ty) -> $output:ty;
    )+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default)]
            $vis struct $name;

            impl $crate::Procedure for $name {
                const PATH: &'static str = $path;
                const KIND: $crate::OperationKind = $crate::procedure!(@kind $kind);
                type Input = $input;
                type Output = $output;
            }
        )+
    };
}
