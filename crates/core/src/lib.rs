//! Per-frame video processing: decode a video, run a transform over every
//! frame, write the result and optionally carry the source audio across.

pub mod shared {
    pub mod constants;
    pub mod fourcc;
    pub mod frame;
    pub mod video_metadata;
}

pub mod transform {
    pub mod domain {
        pub mod channels;
        pub mod frame_transform;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod audio_remuxer;
        pub mod frame_display;
        pub mod video_reader;
        pub mod video_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod pipeline_logger;
    pub mod process_options;
    pub mod process_video_use_case;
}
