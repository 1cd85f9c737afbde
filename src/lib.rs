pub mod queue;
pub mod sched;
pub mod sim;
pub mod stats;
pub mod trace;

#[cfg(test)]
mod test;
