//! Binary entrypoint for cmsync-cli (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = cmsync_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
