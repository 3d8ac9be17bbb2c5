fn main() {
    if let Err(err) = mapmaker::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
