mod board;
mod capacity;
mod commitment;
mod delivery;
mod issue;
mod project;
mod sprint;
mod tasks;
mod team;

pub use board::{Board, BoardLocation};
pub use capacity::{CapacityFile, CapacityPerson};
pub use commitment::{CommitmentFile, CommitmentIssue, CommitmentTotal};
pub use delivery::{DeliveryFile, DeliveryIssue, DeliveryTotal, Income, Outcome};
pub use issue::{Issue, IssueBrief};
pub use project::Project;
pub use sprint::{Sprint, SprintFile, SprintProject};
pub use tasks::{Epic, EpicLink, LinkRef, Task, TaskLinks, TasksFile};
pub use team::{JiraUser, Person, TeamFile};
