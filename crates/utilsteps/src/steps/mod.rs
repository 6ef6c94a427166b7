//! The utility steps.

mod available_memory;
mod generate_uuid;
mod num_cpu;
mod timestamp;
mod wait;

pub use available_memory::{AvailableMemory, AvailableMemoryOutput, SuccessOutputAvailableMemory};
pub use generate_uuid::{GenerateUuid, SuccessOutputUuid, UuidOutput};
pub use num_cpu::{NumCpu, NumCpuOutput, SuccessOutputNumCpu, CPU_COUNT_UNDETERMINED};
pub use timestamp::{GenerateTimestamp, SuccessOutputTimestamp, TimestampOutput};
pub use wait::{SuccessOutputWait, Wait, WaitInput, WaitOutput};
