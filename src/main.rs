fn main() {
    if let Err(err) = csv_nest::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
