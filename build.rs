use std::env;
use std::path::Path;

fn main() {
    // 获取项目根目录
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();

    // 检查持仓数据目录
    let data_dir = Path::new(&manifest_dir).join("datasets");
    if !data_dir.exists() {
        println!("cargo:warning=datasets directory not found. The binary expects eq_<YYYY>1231.xlsx files there.");
        println!("cargo:warning=Pass --data-dir to point at another location.");
    } else {
        println!("cargo:rerun-if-changed=datasets");
    }
}
