mod generate_deterministic_keypairs;

pub use generate_deterministic_keypairs::{
    generate_deterministic_keypair, generate_deterministic_keypairs,
};
