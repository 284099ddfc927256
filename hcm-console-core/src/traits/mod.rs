//! Collaborator abstraction trait definition

mod notifier;
mod transport;
mod translator;

pub use notifier::{Navigator, NoopNavigator, NoopNotifier, Notice, Notifier, Theme};
pub use transport::ResourceTransport;
pub use translator::{interpolate, IdentityTranslator, Translator};
