use memoflow::{open_default_cache, BinOp, CallableBuilder, Heap, Instr, Value};

fn main() {
    // Cargar variables de entorno desde .env si existe (antes de leer CONFIG)
    let _ = dotenvy::dotenv();

    let cache = match open_default_cache() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("no se pudo abrir la cache: {e}");
            return;
        }
    };

    // f(x) = x * factor, con `factor` global del módulo
    let mut heap = Heap::new();
    let m = heap.add_module("demo");
    if let Err(e) = heap.set_global(m, "factor", 3) {
        eprintln!("{e}");
        return;
    }
    let f = match heap.define(m,
                              "scale",
                              CallableBuilder::new("scale").param("x").instrs([Instr::LoadLocal("x".into()),
                                                                               Instr::LoadGlobal("factor".into()),
                                                                               Instr::Binary(BinOp::Mul),
                                                                               Instr::Return]))
    {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    let args = [Value::from(14)];
    let key = cache.key_for(&heap, f, &args);
    println!("key: {key}");
    for round in 1..=2 {
        let v: i64 = cache.memoize(&heap, f, &args, || {
                              println!("  computando scale(14)...");
                              14 * 3
                          });
        println!("ronda {round}: {v}");
    }
    if let Some(info) = cache.entry_info(&key) {
        println!("entrada: poblada {} ({} bytes)", info.populated_at, info.size);
    }
    println!("stats: {:?}", cache.stats());
    if let Err(e) = cache.close() {
        eprintln!("flush fallido: {e}");
    }
}
