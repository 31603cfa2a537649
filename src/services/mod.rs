pub mod pair_sink;
pub mod reassembler;

pub use pair_sink::PairSink;
pub use reassembler::{Reassembler, ReassemblyOutput, OUTPUT_SUFFIX};
