fn main() {
    if let Err(err) = sentree::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
