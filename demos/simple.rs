use swatch_core::compile;

fn main() {
    let source = r#"
        let brand: { primary: #3366ff, muted: #99aabb };

        theme light: {
            background: #ffffff;
            accent: brand.primary;
            grays: [#000000..#ffffff^5]
        };

        font body: { family: "Inter", weights: [4, 7], style: 'normal' } from "fonts/inter.ttf";
    "#;

    let compilation = compile(source);
    if !compilation.is_ok() {
        eprintln!("{}", compilation.render_errors("example.swatch", source));
    }

    match compilation.to_json() {
        Ok(json) => println!("Compiled swatch to JSON:\n{json}"),
        Err(e) => eprintln!("Failed to serialize: {e}"),
    }
}
