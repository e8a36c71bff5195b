use casegrid_generate::GeneratorRegistry;

fn main() {
    let registry = GeneratorRegistry::new();
    for generator in registry.iter() {
        println!("{:<12} {}", generator.id(), generator.summary());
    }
}
