pub mod operator_seed;
