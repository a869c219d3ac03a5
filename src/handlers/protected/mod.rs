// handlers/protected/mod.rs - Handlers behind the session gate
//
// Every handler receives the caller as a `Principal` and runs the ownership
// checks for its path before touching the store.

pub mod alerts;
pub mod emergency_profile;
pub mod medical_records;
pub mod pets;
pub mod resources;
pub mod scheduled_tasks;
pub mod treatment_plans;
pub mod users;
pub mod wellness_timeline;

mod params;
