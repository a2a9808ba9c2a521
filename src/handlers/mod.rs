// HTTP handlers, grouped by surface.
//
// `users` carries the two public account routes; `resource` is the generic
// token-gated CRUD group instantiated once per catalog kind. `payload` holds
// the shared body extractor both use.
pub mod payload;
pub mod resource;
pub mod users;
