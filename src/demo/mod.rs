//! Demo mode: a simulated tracker plus a generator of live samples, so the
//! dashboard can be exercised without the real tracker installed.

mod generator;
mod launcher;

pub use generator::MockGenerator;
pub use launcher::SimulatedLauncher;
