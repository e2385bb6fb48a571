pub mod boards;
pub mod capacity;
pub mod comments;
pub mod commitment;
pub mod delivery;
pub mod projects;
pub mod report;
pub mod sprints;
pub mod tasks;
pub mod team;
