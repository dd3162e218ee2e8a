fn main() {
    if let Err(err) = student_analytics::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
