//! Basic smoke test to verify crate compiles.

#[test]
fn crate_compiles() {
    // If this test runs, the public surface is wired up.
    let _ = std::any::type_name::<presence_gate::GateConfig>();
    let _ = std::any::type_name::<presence_gate::GateError>();
    let _ = std::any::type_name::<presence_gate::AuthorizationGate>();
}
