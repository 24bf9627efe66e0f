pub mod copy_move;
pub mod dct;
pub mod duplicate;
pub mod feature_index;
pub mod partition;
