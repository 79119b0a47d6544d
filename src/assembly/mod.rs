pub mod path_assembler;
