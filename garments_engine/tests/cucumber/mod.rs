mod inventory_world;
mod setups;
mod steps;

pub use inventory_world::InventoryWorld;
