pub(crate) mod errors;
pub(crate) mod extract;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod router;

mod exams;
mod marks;
mod results;
mod setup;
mod students;
