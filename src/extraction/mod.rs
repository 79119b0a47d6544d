pub mod path_extractor;
