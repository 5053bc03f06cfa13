/// API route handlers, one module per resource
///
/// - `health`: Liveness and database status
/// - `auth`: Register, login, refresh, current user
/// - `users`: Profile, password, admin user list
/// - `projects`, `tasks`: Owned resources
/// - `dashboard`, `activities`: Aggregates and the activity feed
/// - `legacy`: Public demo metrics

pub mod activities;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod legacy;
pub mod projects;
pub mod tasks;
pub mod users;
