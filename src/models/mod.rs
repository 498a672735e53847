pub mod lab;
pub mod medication;
pub mod patient;

pub use lab::RawLabRecord;
pub use medication::{DrugCandidate, MedicationEntry};
pub use patient::RawPatientRecord;
