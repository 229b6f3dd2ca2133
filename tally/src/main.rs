mod cli;
mod driver;
mod editor;
mod report;

fn main() {
    driver::Driver::new().run();
}
