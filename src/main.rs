use bulksend::error::AppResult;

fn main() -> AppResult<()> {
    bulksend::entry::run()
}
