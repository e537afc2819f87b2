pub mod bullet;
pub mod input;
pub mod interval;
pub mod settings;
pub mod tick;
pub mod world;

pub use bullet::{Bullet, BulletHit};
pub use input::InputCommand;
pub use interval::Interval;
pub use settings::{TickSettings, WeaponSettings, WorldSettings};
pub use tick::FixedStep;
pub use world::World;
