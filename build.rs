fn main() {
    // Stamp the build timestamp exposed as relaykit::BUILD_DATE.
    let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    println!("cargo:rustc-env=BUILD_DATE={}", stamp);
}
