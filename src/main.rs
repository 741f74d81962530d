fn main() {
    swing_analyzer_lib::run()
}
