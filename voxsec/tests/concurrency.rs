use rayon::prelude::*;
use voxsec::config::{Config, PoolLimits};
use voxsec::position::SectionPosition;
use voxsec::{Context, Kind, Section, AIR};

fn height(seed: u32, x: u8, z: u8) -> u8 {
	let hash = (seed ^ ((x as u32) << 8) ^ (z as u32)).wrapping_mul(2654435761);
	(hash >> 28) as u8
}

fn generate(ctx: &Context, seed: u32) -> Section {
	let mut section = Section::new();

	for x in 0..16 {
		for z in 0..16 {
			let top = height(seed, x, z);
			section.write_column(ctx, x, z, 0, top, 1);

			if top < 15 {
				section.write_column(ctx, x, z, top + 1, top + 1, 2 + (seed % 4) as u16);
			}

			// Every seventh column gets an overhang, which escalates it.
			if (x + z) as u32 % 7 == seed % 7 && top > 2 {
				section.set_block(ctx, x, top - 1, z, AIR);
			}
		}
	}

	section.finalize(ctx);
	section
}

#[test]
fn parallel_builds_share_pools() {
	let config = Config { pools: PoolLimits { scratch: 4, dense: 4, occupancy: 4, escalated: 64 }, ..Config::default() };
	let ctx = Context::new(&config);

	let sections: Vec<Section> = (0..128u32).into_par_iter().map(|seed| generate(&ctx, seed)).collect();

	for (seed, section) in sections.iter().enumerate() {
		let expected = generate(&Context::default(), seed as u32);

		assert_ne!(section.kind(), Kind::Empty);
		assert_eq!(section.non_air_count(), expected.non_air_count());
		assert_eq!(section.internal_exposure(), expected.internal_exposure());

		for position in SectionPosition::enumerate() {
			assert_eq!(section.get(position), expected.get(position));
		}
	}

	let pools = ctx.pools();

	assert!(pools.scratch.idle() <= 4);
	assert!(pools.dense.idle() <= 4);
	assert!(pools.escalated.idle() <= 64);
}

#[test]
fn global_context_across_threads() {
	let kinds: Vec<Kind> = (0..32u32).into_par_iter().map(|seed| {
		let ctx = Context::global();
		let mut section = generate(ctx, seed);
		let kind = section.kind();

		section.release(ctx);
		kind
	}).collect();

	assert!(kinds.iter().all(|&kind| kind != Kind::Empty));
	assert!(Context::global().pools().scratch.idle() >= 1);
}
