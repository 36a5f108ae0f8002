use crate::config::ExtensionSettings;
use crate::extension::FirebaseExtension;
use crate::memory::MemoryBackends;

/// Build a facade over fresh in-memory backends for use in tests.
///
/// The backends are returned alongside so tests can seed data, inject faults
/// and inspect listener registrations.
pub fn memory_extension() -> (MemoryBackends, FirebaseExtension) {
    let backends = MemoryBackends::default();
    let extension = backends
        .builder()
        .settings(ExtensionSettings::default())
        .build()
        .expect("every in-memory backend is configured");
    (backends, extension)
}
