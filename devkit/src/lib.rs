/*!
# Solsphere DevKit - Stubs et utilitaires de test

Bibliothèque facilitant les tests du dashboard Solsphere avec:
- Builders et flottes de référence pour le moteur
- Backend HTTP stub (machines + conformité) sans vrai serveur
- Harness combinant logging de test et backend stub
*/

pub mod backend_stub;
pub mod fixtures;
pub mod test_utils;

pub use backend_stub::StubBackend;
pub use fixtures::{sample_fleet, MachineBuilder};
pub use test_utils::{init_logging, TestHarness, FIXTURE_NOW};
