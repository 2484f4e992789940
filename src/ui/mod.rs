//! Interactive input selection for paths not given on the command line.

pub mod dialogs;
