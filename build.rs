fn main() {
    // Only the ESP-IDF build needs the sysenv link arguments; host builds
    // (tests, simulation) have nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
