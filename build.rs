fn main() {
    // ESP-IDF link arguments are only needed when building for the board.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
