pub mod cards;
pub mod classifier;
pub mod indicators;
pub mod provider;
pub mod store;
pub mod synthetic;

pub use cards::{indicator_cards, is_favorable, GoodDirection, IndicatorCard};
pub use classifier::{ClassifierRule, FixedPicker, LabelPicker, RandomPicker, SignalClassifier};
pub use provider::{DataProvider, ProvidedBundle};
pub use store::{BundleStore, Snapshot, Subscription};
pub use synthetic::{BundleGenerator, RandomBundleGenerator};
