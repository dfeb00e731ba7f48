// Composition root.
//
// Responsibilities
// - Read config from the environment.
// - Wire the document store, mailer and clock into the ticket use cases.
// - Expose them over HTTP and GraphQL.

pub mod config;
pub mod graphql;
pub mod http;
pub mod state;
