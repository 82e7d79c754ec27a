//! Persisted entities derived from the event stream.
//!
//! Entities never reference each other directly: relations are plain id
//! strings resolved by loading from the [`crate::store::Store`] again.
//! Every field is zero-initialized on creation, so there is no "unset"
//! state to distinguish from zero when an entity is read back.

mod order;
mod position;
mod product;
mod user;
mod vault;

use std::fmt;

pub use order::*;
pub use position::*;
pub use product::*;
pub use user::*;
pub use vault::*;

/// Common interface of every persisted entity.
pub trait Entity: Clone + fmt::Debug + Sized {
    /// Id namespace of the entity type.
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn into_record(self) -> Record;

    fn from_record(record: &Record) -> Option<&Self>;
}

macro_rules! entities {
    ($($name:ident),* $(,)?) => {
        /// Id namespace of an entity type.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum EntityKind {
            $($name),*
        }

        impl EntityKind {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(EntityKind::$name => stringify!($name)),*
                }
            }
        }

        /// Any entity, as held by a store.
        #[derive(Clone, Debug, PartialEq)]
        pub enum Record {
            $($name($name)),*
        }

        impl Record {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Record::$name(_) => EntityKind::$name),*
                }
            }

            pub fn id(&self) -> &str {
                match self {
                    $(Record::$name(e) => &e.id),*
                }
            }
        }

        $(
            impl Entity for $name {
                const KIND: EntityKind = EntityKind::$name;

                fn id(&self) -> &str {
                    &self.id
                }

                fn into_record(self) -> Record {
                    Record::$name(self)
                }

                fn from_record(record: &Record) -> Option<&Self> {
                    match record {
                        Record::$name(e) => Some(e),
                        _ => None,
                    }
                }
            }
        )*
    };
}

entities!(
    Vault,
    VaultDayData,
    VaultEpochData,
    Product,
    Position,
    Transaction,
    Trade,
    Liquidation,
    User,
    Stake,
    Staker,
    UserToProxy,
    Order,
    MarketOrder,
    OrderStat,
    Activity,
);

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
