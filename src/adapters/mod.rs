// Adapters layer: file formats at the edges of the core (CSV in, reports out)

pub mod catalogue_csv;
pub mod report;
