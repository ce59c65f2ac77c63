use anyhow::{Context, Result};
use btfparse::{Btf, BtfType};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "btfparse", about = "Decode and dump BTF type information")]
pub struct Command {
    #[structopt(help = "The path of the BTF file", default_value = "/sys/kernel/btf/vmlinux")]
    path: String,
    #[structopt(long, help = "base BTF file path, for split BTF")]
    base: Option<String>,
    #[structopt(long, help = "only dump the type with this id")]
    id: Option<u32>,
}

fn dump(btf: &Btf, id: u32, ty: &BtfType) -> Result<()> {
    let name = btf.name_of(ty)?;
    println!("[{}] {} '{}' {:?}", id, ty.kind(), name, ty);
    Ok(())
}

fn run(opts: &Command, btf: &Btf) -> Result<()> {
    println!(
        "{}: {} types (start id {}), {:?} endian, pointer size {}",
        opts.path,
        btf.nr_types(),
        btf.start_id(),
        btf.endianness(),
        btf.pointer_size()
    );

    if let Some(id) = opts.id {
        let ty = btf.type_by_id(id)?;
        return dump(btf, id, &ty);
    }

    for ty in btf.types() {
        let (id, ty) = ty?;
        dump(btf, id, &ty)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Command::from_args();

    match &opts.base {
        Some(base_path) => {
            let base = Btf::from_file(base_path)
                .with_context(|| format!("failed to load base BTF {}", base_path))?;
            let btf = Btf::from_split_file(&opts.path, &base)
                .with_context(|| format!("failed to load split BTF {}", opts.path))?;
            run(&opts, &btf)
        }
        None => {
            let btf = Btf::from_file(&opts.path)
                .with_context(|| format!("failed to load BTF {}", opts.path))?;
            run(&opts, &btf)
        }
    }
}
